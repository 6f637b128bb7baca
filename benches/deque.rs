use criterion::{Criterion, black_box, criterion_group, criterion_main};
use segmented_deque::SegmentedDeque;
use std::collections::VecDeque;

fn bench_deque(c: &mut Criterion) {
    let n = 4096;
    {
        let mut group = c.benchmark_group("VecDeque vs SegmentedDeque (PushBack 4096)");
        group.bench_function("std::collections::VecDeque", |b| {
            b.iter(|| {
                let mut d = VecDeque::new();
                for i in 0..n {
                    d.push_back(black_box(i as i32));
                }
                d
            })
        });

        group.bench_function("SegmentedDeque<i32>", |b| {
            b.iter(|| {
                let mut d: SegmentedDeque<i32> = SegmentedDeque::new();
                for i in 0..n {
                    d.push_back(black_box(i as i32));
                }
                d
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("VecDeque vs SegmentedDeque (Alternating ends 4096)");
        group.bench_function("std::collections::VecDeque", |b| {
            b.iter(|| {
                let mut d = VecDeque::new();
                for i in 0..n {
                    if i % 2 == 0 {
                        d.push_front(black_box(i as i32));
                    } else {
                        d.push_back(black_box(i as i32));
                    }
                }
                d
            })
        });

        group.bench_function("SegmentedDeque<i32>", |b| {
            b.iter(|| {
                let mut d: SegmentedDeque<i32> = SegmentedDeque::new();
                for i in 0..n {
                    if i % 2 == 0 {
                        d.push_front(black_box(i as i32));
                    } else {
                        d.push_back(black_box(i as i32));
                    }
                }
                d
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("VecDeque vs SegmentedDeque (Queue churn 4096)");
        let mut d_std: VecDeque<i32> = (0..64).collect();
        let mut d_seg: SegmentedDeque<i32> = (0..64).collect();

        group.bench_function("std::collections::VecDeque", |b| {
            b.iter(|| {
                for i in 0..n {
                    d_std.push_back(black_box(i as i32));
                    black_box(d_std.pop_front());
                }
            })
        });

        group.bench_function("SegmentedDeque<i32>", |b| {
            b.iter(|| {
                for i in 0..n {
                    d_seg.push_back(black_box(i as i32));
                    black_box(d_seg.pop_front());
                }
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("VecDeque vs SegmentedDeque (Iterate 4096)");
        let d_std: VecDeque<i32> = (0..n as i32).collect();
        let d_seg: SegmentedDeque<i32> = (0..n as i32).collect();

        group.bench_function("std::collections::VecDeque", |b| {
            b.iter(|| black_box(d_std.iter().sum::<i32>()))
        });

        group.bench_function("SegmentedDeque<i32>", |b| {
            b.iter(|| black_box(d_seg.iter().sum::<i32>()))
        });
        group.finish();
    }
}

criterion_group!(benches, bench_deque);
criterion_main!(benches);
