// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Seeded, non-cryptographic block digests.

use std::fmt;

/// The seed for every digest computed during one run.
///
/// It's drawn once at startup and passed to whoever needs to hash,
/// so two runs scatter the same blocks differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSeed(u64);

impl RunSeed {
    pub fn random() -> Self {
        Self(rand::random())
    }

    pub const fn fixed(seed: u64) -> Self {
        Self(seed)
    }

    pub fn digest(self, data: &[u8]) -> u64 {
        hash(self.0, data)
    }
}

impl fmt::Display for RunSeed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

const S0: u64 = 0xa0761d6478bd642f;
const S1: u64 = 0xe7037ed1a0b428db;
const S2: u64 = 0x8ebc6af09c88c6e3;
const S3: u64 = 0x589965cc75374cc3;

/// The venerable wyhash hash function.
///
/// It's fast, has good statistical properties, and is in the public domain.
/// See: <https://github.com/wangyi-fudan/wyhash>
pub fn hash(mut seed: u64, data: &[u8]) -> u64 {
    let len = data.len();
    let a;
    let b;

    seed ^= S0;

    if len <= 16 {
        if len >= 4 {
            let q = (len >> 3) << 2;
            a = (wyr4(data) << 32) | wyr4(&data[q..]);
            b = (wyr4(&data[len - 4..]) << 32) | wyr4(&data[len - 4 - q..]);
        } else if len > 0 {
            a = wyr3(data);
            b = 0;
        } else {
            a = 0;
            b = 0;
        }
    } else {
        let mut p = data;
        if p.len() > 48 {
            let mut seed1 = seed;
            let mut seed2 = seed;
            while p.len() > 48 {
                seed = wymix(wyr8(p) ^ S1, wyr8(&p[8..]) ^ seed);
                seed1 = wymix(wyr8(&p[16..]) ^ S2, wyr8(&p[24..]) ^ seed1);
                seed2 = wymix(wyr8(&p[32..]) ^ S3, wyr8(&p[40..]) ^ seed2);
                p = &p[48..];
            }
            seed ^= seed1 ^ seed2;
        }
        while p.len() > 16 {
            seed = wymix(wyr8(p) ^ S1, wyr8(&p[8..]) ^ seed);
            p = &p[16..];
        }
        // The tail reads may reach back into bytes that were already mixed in.
        a = wyr8(&data[len - 16..]);
        b = wyr8(&data[len - 8..]);
    }

    wymix(S1 ^ (len as u64), wymix(a ^ S1, b ^ seed))
}

fn wyr3(p: &[u8]) -> u64 {
    let k = p.len();
    ((p[0] as u64) << 16) | ((p[k >> 1] as u64) << 8) | p[k - 1] as u64
}

fn wyr4(p: &[u8]) -> u64 {
    let mut buf = [0; 4];
    buf.copy_from_slice(&p[..4]);
    u32::from_le_bytes(buf) as u64
}

fn wyr8(p: &[u8]) -> u64 {
    let mut buf = [0; 8];
    buf.copy_from_slice(&p[..8]);
    u64::from_le_bytes(buf)
}

// This is a weak mix function on its own, but it's very fast.
pub fn wymix(lhs: u64, rhs: u64) -> u64 {
    let r = lhs as u128 * rhs as u128;
    (r >> 64) as u64 ^ (r as u64)
}
