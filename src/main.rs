fn main() -> std::process::ExitCode {
    crochet_lib::run()
}
