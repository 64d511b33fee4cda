fn main() {
    #[cfg(feature = "cli")]
    dmadiff::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("dmadiff: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
