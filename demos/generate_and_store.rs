use neural_gallery::{
    ArtifactStore, GenerationRequest, JobOrchestrator, NeuralClient, OrchestratorConfig,
};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let store = Arc::new(
        ArtifactStore::open(Some(&PathBuf::from("/tmp/neural-gallery-demo.db"))).unwrap(),
    );

    let client = NeuralClient::new("http://127.0.0.1:8080/v1");
    let orchestrator =
        JobOrchestrator::new(client, Arc::clone(&store), OrchestratorConfig::default());

    orchestrator
        .progress_text()
        .subscribe(|t| println!("progress: {}", t));
    orchestrator.on_complete(|summary| {
        println!(
            "order {} done: {} saved, {} duplicates, {} failed",
            summary.order_id,
            summary.saved,
            summary.duplicates,
            summary.failed()
        );
    });

    let request = GenerationRequest::new("a sunset over mountains")
        .with_style("Painting")
        .with_layout("Square")
        .with_amount("4");

    match orchestrator.submit(&request).await {
        Ok(summary) => {
            for failure in &summary.failures {
                println!("  failed: {} ({})", failure.caption, failure.error);
            }
            println!("gallery now holds {} artifacts", store.len().unwrap());
        }
        Err(e) => println!("job failed: {}", e),
    }
}
