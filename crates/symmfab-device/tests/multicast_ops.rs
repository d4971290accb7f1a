//! Multicast load-reduce and store tests over simulated replica sets

use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use half::bf16;
use symmfab_device::{multimem_ld_reduce_add, multimem_st, McPtr, Vec16, Vec4, Vec8, VecPayload};

/// Per-rank replica storage for one symmetric buffer.
struct Replicas {
    words: Vec<Vec<AtomicU32>>,
}

impl Replicas {
    fn new(world_size: usize, words: usize) -> Self {
        Self {
            words: (0..world_size)
                .map(|_| (0..words).map(|_| AtomicU32::new(0)).collect())
                .collect(),
        }
    }

    fn mc<T>(&self) -> McPtr<T> {
        let ptrs: Vec<*mut T> = self.words.iter().map(|r| r.as_ptr() as *mut T).collect();
        McPtr::from_replicas(&ptrs).unwrap()
    }

    /// Local (unicast) write of one rank's replica contents.
    fn fill_rank(&self, rank: usize, values: &[u32]) {
        for (word, &value) in self.words[rank].iter().zip(values) {
            word.store(value, Ordering::Relaxed);
        }
    }

    fn rank_words(&self, rank: usize) -> Vec<u32> {
        self.words[rank].iter().map(|w| w.load(Ordering::Relaxed)).collect()
    }
}

fn f32_words(values: &[f32]) -> Vec<u32> {
    bytemuck::cast_slice(values).to_vec()
}

#[test]
fn ld_reduce_sums_f32_across_ranks_at_all_widths() {
    for world_size in [2, 4, 8] {
        let replicas = Replicas::new(world_size, 4);
        let input = [1.5f32, -2.0, 0.25, 1024.0];
        for rank in 0..world_size {
            replicas.fill_rank(rank, &f32_words(&input));
        }
        let mc = replicas.mc::<f32>();

        let v4: Vec4 = unsafe { multimem_ld_reduce_add(mc) };
        let v8: Vec8 = unsafe { multimem_ld_reduce_add(mc) };
        let v16: Vec16 = unsafe { multimem_ld_reduce_add(mc) };

        for (width, lanes) in [
            (Vec4::U32_LANES, v4.to_u32_lanes()),
            (Vec8::U32_LANES, v8.to_u32_lanes()),
            (Vec16::U32_LANES, v16.to_u32_lanes()),
        ] {
            for lane in 0..width {
                let expected = input[lane] * world_size as f32;
                let got = f32::from_bits(lanes[lane]);
                assert!(
                    (got - expected).abs() <= f32::EPSILON * expected.abs(),
                    "world {world_size} lane {lane}: got {got}, expected {expected}"
                );
            }
        }
    }
}

#[test]
fn ld_reduce_sums_bf16_pairs() {
    let world_size = 4;
    let replicas = Replicas::new(world_size, 2);
    // Each 32-bit lane packs two bf16 elements (low, high).
    let pack = |lo: f32, hi: f32| {
        u32::from(bf16::from_f32(lo).to_bits()) | (u32::from(bf16::from_f32(hi).to_bits()) << 16)
    };
    for rank in 0..world_size {
        replicas.fill_rank(rank, &[pack(1.0, -3.0), pack(0.5, 8.0)]);
    }

    let out: Vec8 = unsafe { multimem_ld_reduce_add(replicas.mc::<bf16>()) };
    let lanes = out.to_u32_lanes();

    let unpack = |lane: u32| {
        (
            bf16::from_bits(lane as u16).to_f32(),
            bf16::from_bits((lane >> 16) as u16).to_f32(),
        )
    };
    assert_eq!(unpack(lanes[0]), (4.0, -12.0));
    assert_eq!(unpack(lanes[1]), (2.0, 32.0));
}

#[test]
fn st_broadcasts_to_every_replica() {
    let world_size = 8;
    let replicas = Replicas::new(world_size, 4);
    let payload = [3.0f32, -1.0, 0.5, 2.5];
    let value = Vec16::from_u32_lanes(f32_words(&payload).try_into().unwrap());

    unsafe { multimem_st(replicas.mc::<f32>(), value) };

    for rank in 0..world_size {
        assert_eq!(replicas.rank_words(rank), f32_words(&payload), "rank {rank} replica");
    }
}

#[test]
fn st_then_ld_reduce_round_trips() {
    let world_size = 4;
    let replicas = Replicas::new(world_size, 1);
    let value = Vec4::from_u32_lanes([7.0f32.to_bits(), 0, 0, 0]);
    let mc = replicas.mc::<f32>();

    // A multicast store lands V in every replica, so the fan-in reduction
    // observes world_size contributions of V.
    unsafe { multimem_st(mc, value) };
    let out: Vec4 = unsafe { multimem_ld_reduce_add(mc) };
    assert_eq!(f32::from_bits(out.to_u32_lanes()[0]), 7.0 * world_size as f32);
}

#[test]
fn single_contributor_reduces_to_its_value() {
    let world_size = 4;
    let replicas = Replicas::new(world_size, 1);
    // Local writes: rank 2 contributes V, everyone else 0.
    replicas.fill_rank(2, &[42.0f32.to_bits()]);

    let out: Vec4 = unsafe { multimem_ld_reduce_add(replicas.mc::<f32>()) };
    assert_eq!(f32::from_bits(out.to_u32_lanes()[0]), 42.0);
}

#[test]
fn concurrent_device_stores_leave_one_payload() {
    // Several simulated devices race multicast stores of their own payload;
    // relaxed fan-out guarantees per-word atomicity only, but identical
    // lane counts mean every replica ends with some contributor's word.
    let world_size = 4;
    let replicas = Replicas::new(world_size, 1);
    let mc = replicas.mc::<f32>();

    thread::scope(|s| {
        for device in 0..world_size {
            s.spawn(move || {
                let value = Vec4::from_u32_lanes([(device as f32 + 1.0).to_bits(), 0, 0, 0]);
                unsafe { multimem_st(mc, value) };
            });
        }
    });

    let contributions: Vec<u32> = (1..=world_size).map(|d| (d as f32).to_bits()).collect();
    for rank in 0..world_size {
        let word = replicas.rank_words(rank)[0];
        assert!(contributions.contains(&word), "rank {rank} holds a torn word");
    }
}

#[test]
fn trap_surfaces_as_failed_launch() {
    let replicas = Replicas::new(2, 4);
    let ptrs: Vec<*mut f32> = replicas.words.iter().map(|r| r.as_ptr() as *mut f32).collect();
    let mc = McPtr::without_multicast(&ptrs).unwrap();

    // The lane's trap unwinds its thread; the host observes a failed join.
    let result = thread::Builder::new()
        .name("lane-0".into())
        .spawn(move || -> Vec8 { unsafe { multimem_ld_reduce_add(mc) } })
        .unwrap()
        .join();
    assert!(result.is_err(), "trap must fail the launch, not return a value");
}
