use std::io;

fn main() -> io::Result<()> {
    locator::run()
}
