//! R-MAT edge generation (Chakrabarti et al., SDM 2004) and uniform attributes

use super::{GeneratorEngine, HostEngine};
use crate::options::RmatOptions;
use rand::Rng;

/// Odd multiplier of the vertex id permutation
const SCRAMBLE_MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;

impl GeneratorEngine for HostEngine {
    #[allow(clippy::cast_possible_wrap)] // scale <= 62
    fn rmat<R: Rng + ?Sized>(options: &RmatOptions, rng: &mut R) -> (Vec<i64>, Vec<i64>) {
        let mask = (1_u64 << options.scale) - 1;
        let ab = options.a + options.b;
        let abc = ab + options.c;

        let mut src = Vec::with_capacity(options.num_edges);
        let mut dst = Vec::with_capacity(options.num_edges);
        for _ in 0..options.num_edges {
            let (mut s, mut d) = (0_u64, 0_u64);
            for _ in 0..options.scale {
                let r: f64 = rng.gen();
                let (bs, bd) = if r < options.a {
                    (0, 0)
                } else if r < ab {
                    (0, 1)
                } else if r < abc {
                    (1, 0)
                } else {
                    (1, 1)
                };
                s = (s << 1) | bs;
                d = (d << 1) | bd;
            }
            if options.clip_and_flip && s < d {
                std::mem::swap(&mut s, &mut d);
            }
            if options.scramble_vertex_ids {
                s = s.wrapping_mul(SCRAMBLE_MULTIPLIER) & mask;
                d = d.wrapping_mul(SCRAMBLE_MULTIPLIER) & mask;
            }
            src.push(s as i64);
            dst.push(d as i64);
        }
        (src, dst)
    }

    fn uniform_values<R: Rng + ?Sized>(n: usize, min: f64, max: f64, rng: &mut R) -> Vec<f64> {
        if min >= max {
            return vec![min; n];
        }
        (0..n).map(|_| rng.gen_range(min..max)).collect()
    }

    fn uniform_integers<R: Rng + ?Sized>(n: usize, min: i32, max: i32, rng: &mut R) -> Vec<i32> {
        if min >= max {
            return vec![min; n];
        }
        (0..n).map(|_| rng.gen_range(min..=max)).collect()
    }
}
