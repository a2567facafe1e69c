use log::LevelFilter;
use mimalloc::MiMalloc;

use stratagem::uci::Uci;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn init_logging() {
    let from_env = std::env::var_os("RUST_LOG").is_some();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
    // the logger accepts everything, `debug on` only has to raise this
    if !from_env {
        log::set_max_level(LevelFilter::Warn);
    }
}

fn main() {
    init_logging();
    eprintln!("stratagem v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("perft") {
        let expected_format = "expected: perft <depth> [<FEN>]";
        let Some(depth) = args.get(2).and_then(|d| d.parse::<u32>().ok()) else {
            eprintln!("{}", expected_format);
            std::process::exit(2);
        };
        if let Err(e) = stratagem::perft(depth, args.get(3).map(String::as_str)) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        return;
    }

    match Uci::new() {
        Ok(mut uci) => uci.run(),
        Err(e) => eprintln!("{}", e),
    }
}
