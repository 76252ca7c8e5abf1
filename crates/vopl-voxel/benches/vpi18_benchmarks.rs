use criterion::{Criterion, black_box, criterion_group, criterion_main};
use vopl_voxel::{GridExtents, VoxelGrid, updates, vpi18};

fn full_grid() -> VoxelGrid {
    let extents = GridExtents::default();
    let mut grid = VoxelGrid::new(extents);
    for z in 0..extents.depth {
        for y in 0..extents.height {
            for x in 0..extents.width {
                let _ = grid.set(x, y, z, ((x * 7 + y * 3 + z) % 63 + 1) as u8);
            }
        }
    }
    grid
}

fn bench_vpi18_encode(c: &mut Criterion) {
    let grid = full_grid();
    c.bench_function("vpi18_encode_4096", |bencher| {
        bencher.iter(|| black_box(vpi18::encode_grid(black_box(&grid))))
    });
}

fn bench_vpi18_decode(c: &mut Criterion) {
    let bytes = vpi18::encode_grid(&full_grid());
    c.bench_function("vpi18_decode_4096", |bencher| {
        bencher.iter(|| black_box(vpi18::decode(black_box(&bytes))))
    });
}

fn bench_updates_encode(c: &mut Criterion) {
    let grid = full_grid();
    c.bench_function("updates_encode_4096", |bencher| {
        bencher.iter(|| black_box(updates::encode_grid(black_box(&grid), "0")))
    });
}

criterion_group!(
    benches,
    bench_vpi18_encode,
    bench_vpi18_decode,
    bench_updates_encode
);
criterion_main!(benches);
