fn main() {
    if let Err(err) = retail_clean::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
