fn main() {
    pollster::block_on(mandelbrot_explorer::run());
}
