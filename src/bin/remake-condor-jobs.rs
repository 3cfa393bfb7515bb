fn main() {
  jobtranslator::cli::resubmit::main();
}
