use std::hint::black_box;
use std::time::Instant;

use glam::Vec3;
use realm_terrain::{Ray, Terrain, TerrainConfig};

fn bench_generate(resolution: u32, iterations: usize) {
    let config = TerrainConfig {
        size: 200.0,
        resolution,
    };
    let start = Instant::now();
    for _ in 0..iterations {
        black_box(Terrain::generate(black_box(config)).ok());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  generate (resolution {resolution}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_ground_ray(terrain: &Terrain, iterations: usize) {
    let start = Instant::now();
    let mut hits = 0usize;
    for i in 0..iterations {
        let x = (i % 180) as f32 - 90.0;
        let z = ((i / 180) % 180) as f32 - 90.0;
        let ray = Ray::down(Vec3::new(x + 0.37, 20.0, z + 0.61));
        if black_box(terrain.raycast(&ray, f32::INFINITY)).is_some() {
            hits += 1;
        }
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  ground ray ({iterations} casts, {hits} hits): {per_iter:?}/cast, total {elapsed:?}");
}

fn bench_slanted_ray(terrain: &Terrain, iterations: usize) {
    let start = Instant::now();
    for i in 0..iterations {
        let ray = Ray::new(
            Vec3::new(-95.0, 12.0, -95.0 + (i % 50) as f32),
            Vec3::new(1.0, -0.05, 1.0),
        );
        black_box(terrain.raycast(&ray, f32::INFINITY));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  slanted ray ({iterations} casts): {per_iter:?}/cast, total {elapsed:?}");
}

fn main() {
    println!("Terrain benchmarks");
    println!("==================");

    println!("\n[generate]");
    bench_generate(50, 50);
    bench_generate(200, 10);

    let terrain = match Terrain::generate(TerrainConfig::default()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("terrain generation failed: {e}");
            return;
        }
    };

    println!("\n[raycast]");
    bench_ground_ray(&terrain, 100_000);
    bench_slanted_ray(&terrain, 100);
}
