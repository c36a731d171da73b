use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crossbeam_utils::{thread, Backoff};
use pointq::{Point, PointQueue};
use std::time::Duration;

const DATA_SZ: usize = 1024 * 1024;

pub fn criterion_benchmark(c: &mut Criterion) {
    let data: Box<[Point]> = (0..DATA_SZ)
        .map(|i| Point::new(i as f64, -(i as f64)))
        .collect();

    c.bench_function("pointq push/pop 1", |bench| {
        let queue = PointQueue::new(1).unwrap();
        bench.iter(|| {
            queue.try_push(black_box(data[7])).unwrap();
            black_box(queue.try_pop().unwrap());
        })
    });

    c.bench_function("pointq 1M/64 try_pop", |bench| {
        bench.iter(|| spin(&data, 64))
    });

    c.bench_function("pointq 1M/1024 try_pop", |bench| {
        bench.iter(|| spin(&data, 1024))
    });

    c.bench_function("pointq 1M/1024 wait", |bench| {
        bench.iter(|| waiting(&data, 1024))
    });

    c.bench_function("xbeam channels 1M/1024", |bench| {
        bench.iter(|| {
            use crossbeam::channel::bounded;
            let (prod, cons) = bounded::<Point>(1024);
            let rdata = &data;

            thread::scope(|sc| {
                sc.spawn(move |_| {
                    rdata.iter().for_each(|p| prod.send(*p).unwrap());
                });

                sc.spawn(move |_| {
                    rdata.iter().for_each(|p| {
                        let x = cons.recv().unwrap();
                        assert_eq!(x, *p);
                    });
                });
            })
            .unwrap();
        })
    });

    c.bench_function("xbeam ArrayQueue 1M/1024", |bench| {
        bench.iter(|| {
            use crossbeam::queue::ArrayQueue;
            let queue: ArrayQueue<Point> = ArrayQueue::new(1024);
            let rdata = &data;
            let queue = &queue;

            thread::scope(|sc| {
                sc.spawn(move |_| {
                    rdata.iter().for_each(|p| {
                        let backoff = Backoff::new();
                        while queue.push(*p).is_err() {
                            backoff.snooze();
                        }
                    });
                });

                sc.spawn(move |_| {
                    rdata.iter().for_each(|p| loop {
                        if let Some(x) = queue.pop() {
                            assert_eq!(x, *p);
                            break;
                        }
                    });
                });
            })
            .unwrap();
        })
    });

    use heapless::spsc::Queue;

    // heapless sacrifices a slot too, 1024 slots hold 1023 points
    let mut hqueue: Queue<Point, 1024> = Queue::new();
    let (mut prod, mut cons) = hqueue.split();

    c.bench_function("heapless spsc::Queue 1M/1023", |bench| {
        bench.iter(|| {
            black_box(thread::scope(|sc| {
                sc.spawn(|_| {
                    data.iter().for_each(|p| {
                        let mut x = *p;
                        loop {
                            match prod.enqueue(x) {
                                Ok(_) => break,
                                Err(y) => x = y,
                            };
                        }
                    });
                });

                sc.spawn(|_| {
                    data.iter().for_each(|p| loop {
                        if let Some(x) = cons.dequeue() {
                            assert_eq!(x, *p);
                            break;
                        }
                    });
                });
            }))
            .unwrap();
        })
    });
}

fn spin(data: &[Point], capacity: usize) {
    let queue = PointQueue::new(capacity).unwrap();
    let (prod, cons) = (queue.producer(), queue.consumer());

    thread::scope(|sc| {
        sc.spawn(|_| {
            data.iter().for_each(|p| {
                let backoff = Backoff::new();
                while prod.try_push(*p).is_err() {
                    backoff.snooze();
                }
            });
        });

        sc.spawn(|_| {
            data.iter().for_each(|p| loop {
                if let Ok(x) = cons.try_pop() {
                    assert_eq!(x, *p);
                    break;
                }
            });
        });
    })
    .unwrap();
}

fn waiting(data: &[Point], capacity: usize) {
    let queue = PointQueue::new(capacity).unwrap();
    let (prod, cons) = (queue.producer(), queue.consumer());

    thread::scope(|sc| {
        sc.spawn(|_| {
            data.iter().for_each(|p| {
                let backoff = Backoff::new();
                while prod.try_push(*p).is_err() {
                    backoff.snooze();
                }
            });
        });

        sc.spawn(|_| {
            data.iter().for_each(|p| {
                let x = cons.recv_timeout(Duration::from_secs(10)).unwrap();
                assert_eq!(x, *p);
            });
        });
    })
    .unwrap();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
