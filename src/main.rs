//! A translucent glass cube with glowing edges, circled by four laser beams.

use laser_cube::client;

fn main() {
    client::Runtime::new().run();
}
