use crate::APP_NAME;


pub enum Command {
    Bake(std::fs::File),
    View(String),
    List,
    None,
}



/// bake <config file> --path <dir path>: generate and mesh the chunks of the config, save them to the directory
/// view <bake name> --path <dir path>: open a window rendering a previously baked set of chunks
/// list --path <dir path> : list all bakes
/// --path <dir path> : set the directory where the save data is located, default is ~/.local/share/chunkmesh
///
/// save directory structure:
///   bake1/
///      bake.ron
///      chunk_0_0.mesh
///      chunk_0_1.mesh
///      ...
///   bake2/
///    ...
pub fn parse_cmd_args(args: Vec<String>) -> (Command, std::path::PathBuf) {
    if args.len() < 2 {
        println!("no command specified");
        return (Command::None, std::path::PathBuf::new());
    }
    let cmd = args[1].as_str();

    let mut path = home::home_dir().unwrap().join(".local/share").join(APP_NAME);

    //create save directory if not exists
    if !path.exists() {
        std::fs::create_dir_all(&path).unwrap();
    }

    for i in 0..args.len() {
        if args[i] == "--path" {
            if let Some(path_str) = args.get(i+1) {
                path = std::path::PathBuf::from(path_str);
            }
            else {
                println!("no path specified, use default path: {}", path.to_str().unwrap());
            }
        }
    }


    match cmd {
        "bake" => {
            if let Some(config_path) = args.get(2) {
                let config_file = std::fs::File::open(config_path).unwrap_or_else(|err| {
                    panic!("couldn't open {}: {}", config_path, err);
                });

                (Command::Bake(config_file), path)
            }
            else {
                println!("no config file specified");
                (Command::None, path)
            }
        }
        "view" => {
            if let Some(bake_name) = args.get(2) {
                (Command::View(bake_name.to_string()), path)
            }
            else {
                println!("no bake name specified");
                (Command::None, path)
            }
        }
        "list" => {
            (Command::List, path)
        }
        _ => {
            println!("invalid command");
            (Command::None, path)
        }
    }
}
