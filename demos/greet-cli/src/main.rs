//! One-shot front end: `greet-cli COMMAND [ARGS]`.
//!
//! Set `CMDFNS_INDEX=/tmp/greet-cli.json` to load only the file that defines
//! the requested command on later runs.

mod commands;

#[tokio::main]
async fn main() -> Result<(), cmdfns::Error> {
    cmdfns::init_subscriber();
    cmdfns::async_main(commands::search_path()).await
}
