fn main() {
    coinminer::main();
}
