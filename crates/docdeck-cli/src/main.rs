//! `docdeck` binary entrypoint.

use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = docdeck_cli::run().await;
    process::exit(exit_code);
}
