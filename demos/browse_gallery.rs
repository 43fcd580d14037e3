use neural_gallery::{ArtifactFilter, ArtifactSort, ArtifactStore};
use std::path::PathBuf;

fn main() {
    let store =
        ArtifactStore::open(Some(&PathBuf::from("/tmp/neural-gallery-demo.db"))).unwrap();

    let mut query = store.open_live_query(ArtifactSort::CreatedDesc, ArtifactFilter::All);
    query.refresh().unwrap();

    if query.count() == 0 {
        println!("gallery is empty — run the generate_and_store example first");
        return;
    }

    println!("{} artifacts, newest first:", query.count());
    for i in 0..query.count() {
        let record = query.record_at(i).unwrap();
        println!(
            "  {} ({} byte preview, {} byte full) saved {}",
            record.caption,
            record.preview.len(),
            record.full.len(),
            record.created_at
        );
    }

    // Hand the newest record off the way a detail view would receive it.
    let selection = query.selection_at(0).unwrap();
    let detail = selection.load(&store).unwrap().unwrap();
    println!("selected: {}", detail.caption);
}
