fn main() {
    #[cfg(feature = "cli")]
    bookcoder::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("bookcoder: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
