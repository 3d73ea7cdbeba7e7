use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = email_radar::cli::Cli::parse();

    if let Err(err) = email_radar::run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
