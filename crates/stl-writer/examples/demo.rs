//! Writes the same two triangles as binary and text STL, plus a box.
//!
//! Run with `cargo run -p stl-writer --example demo`.

use stl_writer::{write_stl_file, MeshSink, Mode, Result, Triangle, Vec3};

fn main() -> Result<()> {
    let v1 = [0.0, 0.0, 0.5];
    let v2 = [0.0, 1.0, 0.0];
    let v3 = [1.0, 1.0, 0.5];
    let v4 = [1.0, 0.0, 0.0];
    let t1 = Triangle::new(v1, v2, v4);
    let t2 = Triangle::new(v2, v3, v4);

    for (path, mode) in [("stl_test_bin.stl", Mode::Binary), ("stl_test_txt.stl", Mode::Text)] {
        let n = write_stl_file(path, mode, "demo", |stl| {
            stl.add_triangle(t1)?;
            stl.add_triangle(t2)?;
            Ok(stl.triangle_count())
        })?;
        println!("wrote {n} triangles to {path} ({mode})");
    }

    let n = write_stl_file("stl_test_box.stl", Mode::Binary, "", |stl| {
        stl.add_cuboid(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 20.0, 5.0))?;
        Ok(stl.triangle_count())
    })?;
    println!("wrote {n} triangles to stl_test_box.stl");
    Ok(())
}
