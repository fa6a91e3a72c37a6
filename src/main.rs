// FBI Remote Installer - daemon, dev server and front end checks
use fbi_installer::cli::CliHandler;

#[tokio::main]
async fn main() {
    let handler = CliHandler::new();

    if let Err(e) = handler.run().await {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}
