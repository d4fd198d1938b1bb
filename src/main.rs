fn main() {
    match kubepods_probe::cli::run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            kubepods_probe::ui::eprintln_error(&err);
            std::process::exit(kubepods_probe::exit::exit_code(&err));
        }
    }
}
