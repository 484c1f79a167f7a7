fn main() {
    if let Err(e) = chat_vault_search::cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
