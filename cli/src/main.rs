use {
    clap::{crate_description, crate_version},
    goodcommit_cli::{
        clap_app::get_clap_app,
        cli::{parse_args, process_command},
    },
    std::process::exit,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = get_clap_app("goodcommit", crate_description!(), crate_version!()).get_matches();
    let result = parse_args(&matches).and_then(|(config, command)| process_command(&config, &command));
    match result {
        Ok(output) => println!("{output}"),
        Err(err) => {
            eprintln!("Error: {err}");
            exit(1);
        }
    }
}
