fn main() {
  jobtranslator::cli::submit::main();
}
