fn main() {
  jobtranslator::cli::query::main();
}
