//! Interactive front end. Reads commands from stdin until `quit`.

#[path = "../commands/mod.rs"]
mod commands;

use cmdfns::Config;

#[tokio::main]
async fn main() -> Result<(), cmdfns::Error> {
    cmdfns::init_subscriber();
    let config = Config::from_env().with_program("greet-shell");
    cmdfns::async_interactive_main_with_config(commands::search_path(), config).await
}
