
mod cli;

pub const APP_NAME: &str = "chunkmesh";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let (cmd, path) = cli::parse_cmd_args(args);
    match cmd {
        cli::Command::Bake(config_file) => {
            chunkmesh::bake(config_file, path)?;
        }

        cli::Command::View(bake_name) => {
            pollster::block_on(chunkmesh::run(path, &bake_name))?;
        }

        cli::Command::List => {
            chunkmesh::list_bakes(path)?;
        }

        cli::Command::None => ()
    }

    Ok(())
}
