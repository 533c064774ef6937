use jobsh::error::ShellError;
use jobsh::flags::Flags;
use jobsh::shell::Shell;
use std::env;

fn run() -> Result<(), ShellError> {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    flags.parse(&args)?;

    if flags.is_set("help") {
        flags.print_help();
        return Ok(());
    }

    if flags.is_set("version") {
        println!("jobsh {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    jobsh::logging::init(&flags);

    let mut shell = Shell::new(flags)?;
    shell.run()
}

fn main() {
    if let Err(e) = run() {
        eprintln!("jobsh: {}", e);
        std::process::exit(1);
    }
}
