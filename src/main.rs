fn main() {
    if let Err(err) = series_tidy::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
