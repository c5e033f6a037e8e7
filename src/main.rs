#[tokio::main]
async fn main() {
    fitcore_backend::run().await;
}
