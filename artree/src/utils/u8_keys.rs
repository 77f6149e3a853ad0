//! Searches over the sorted key-byte arrays used by the small node layouts.

#[cfg(all(
    feature = "simd_keys",
    target_arch = "x86_64",
    target_feature = "sse2"
))]
#[inline]
fn x86_64_sse_find_key_16_up_to(key: u8, keys: &[u8; 16], num_children: usize) -> Option<usize> {
    use std::arch::x86_64::{
        __m128i, _mm_cmpeq_epi8, _mm_loadu_si128, _mm_movemask_epi8, _mm_set1_epi8,
    };

    let bitfield = unsafe {
        let key_vec = _mm_set1_epi8(key as i8);
        let results = _mm_cmpeq_epi8(key_vec, _mm_loadu_si128(keys.as_ptr() as *const __m128i));
        // AVX512 has _mm_cmpeq_epi8_mask which can allow us to skip this step and go direct to a
        // bitmask from comparison results.
        // ... but that's stdsimd nightly only for now, and also not available on all processors.
        let mask = (1i32 << num_children) - 1;
        _mm_movemask_epi8(results) & mask
    };
    if bitfield != 0 {
        return Some(bitfield.trailing_zeros() as usize);
    }
    None
}

#[cfg(all(feature = "simd_keys", target_arch = "aarch64", target_feature = "neon"))]
#[inline]
fn aarch64_neon_find_key_16_up_to(key: u8, keys: &[u8; 16], num_children: usize) -> Option<usize> {
    use std::arch::aarch64::*;
    unsafe {
        if num_children == 0 {
            return None;
        }

        // Fill a vector with the key.
        let key_vec = vdupq_n_u8(key);
        // Load the keys from the node.
        let node_keys_vec = vld1q_u8(keys.as_ptr());
        // 0xFF for each lane equal to the key, 0x00 for everything else.
        let cmp_vec = vceqq_u8(key_vec, node_keys_vec);

        // NEON does not have mm_movemask_epi8, so narrow each 8-bit lane to 4 bits and read the
        // result out as a single 64-bit lane.
        let eq_mask = vreinterpretq_u16_u8(cmp_vec);
        let res = vshrn_n_u16::<4>(eq_mask);
        let matches = vget_lane_u64::<0>(vreinterpret_u64_u8(res));

        if matches != 0 {
            // Div by 4 (r-shift 2) gives us the index of the matching key.
            let idx = (matches.trailing_zeros() >> 2) as usize;
            if idx < num_children {
                return Some(idx);
            }
        }
        None
    }
}

fn binary_find_key(key: u8, keys: &[u8], num_children: usize) -> Option<usize> {
    let mut left = 0;
    let mut right = num_children;
    while left < right {
        let mid = (left + right) / 2;
        match keys[mid].cmp(&key) {
            std::cmp::Ordering::Less => left = mid + 1,
            std::cmp::Ordering::Equal => return Some(mid),
            std::cmp::Ordering::Greater => right = mid,
        }
    }
    None
}

/// Position of `key` among the first `num_children` entries of the ascending `keys`.
#[allow(unreachable_code)]
pub fn u8_keys_find_key_position_sorted<const WIDTH: usize>(
    key: u8,
    keys: &[u8; WIDTH],
    num_children: usize,
) -> Option<usize> {
    // Width 4 and under, just use linear search.
    if WIDTH <= 4 {
        return keys[..num_children].iter().position(|k| *k == key);
    }

    // SIMD optimized forms of 16
    if WIDTH == 16 {
        #[cfg(all(
            feature = "simd_keys",
            target_arch = "x86_64",
            target_feature = "sse2"
        ))]
        {
            if let Ok(keys) = <&[u8; 16]>::try_from(&keys[..]) {
                return x86_64_sse_find_key_16_up_to(key, keys, num_children);
            }
        }

        #[cfg(all(feature = "simd_keys", target_arch = "aarch64", target_feature = "neon"))]
        {
            if let Ok(keys) = <&[u8; 16]>::try_from(&keys[..]) {
                return aarch64_neon_find_key_16_up_to(key, keys, num_children);
            }
        }
    }

    // Fallback to binary search.
    binary_find_key(key, keys, num_children)
}

/// Index at which `key` has to be inserted to keep the first `num_children` entries sorted.
#[inline]
pub fn u8_keys_find_insert_position_sorted(key: u8, keys: &[u8], num_children: usize) -> usize {
    keys[..num_children].partition_point(|k| *k < key)
}

/// Index of the first entry strictly greater than `key`, or of the first entry at all.
#[inline]
pub fn u8_keys_position_after(key: Option<u8>, keys: &[u8], num_children: usize) -> usize {
    match key {
        None => 0,
        Some(key) => keys[..num_children].partition_point(|k| *k <= key),
    }
}

/// One past the index of the last entry strictly smaller than `key`, or `num_children` when
/// there is no upper bound.
#[inline]
pub fn u8_keys_position_before(key: Option<u8>, keys: &[u8], num_children: usize) -> usize {
    match key {
        None => num_children,
        Some(key) => keys[..num_children].partition_point(|k| *k < key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_in_width_4() {
        let keys = [2u8, 7, 9, 255];
        assert_eq!(u8_keys_find_key_position_sorted::<4>(7, &keys, 3), Some(1));
        // 255 is past num_children and must not be reported.
        assert_eq!(u8_keys_find_key_position_sorted::<4>(255, &keys, 3), None);
        assert_eq!(u8_keys_find_key_position_sorted::<4>(3, &keys, 3), None);
    }

    #[test]
    fn find_in_width_16() {
        let mut keys = [255u8; 16];
        for (i, k) in [0u8, 1, 50, 128, 200, 254].iter().enumerate() {
            keys[i] = *k;
        }
        for (i, k) in [0u8, 1, 50, 128, 200, 254].iter().enumerate() {
            assert_eq!(u8_keys_find_key_position_sorted::<16>(*k, &keys, 6), Some(i));
        }
        assert_eq!(u8_keys_find_key_position_sorted::<16>(255, &keys, 6), None);
        assert_eq!(u8_keys_find_key_position_sorted::<16>(2, &keys, 6), None);

        let full: [u8; 16] = std::array::from_fn(|i| (i * 16) as u8 + 15);
        assert_eq!(u8_keys_find_key_position_sorted::<16>(255, &full, 16), Some(15));
    }

    #[test]
    fn insert_and_neighbour_positions() {
        let keys = [10u8, 20, 30, 0];
        assert_eq!(u8_keys_find_insert_position_sorted(5, &keys, 3), 0);
        assert_eq!(u8_keys_find_insert_position_sorted(25, &keys, 3), 2);
        assert_eq!(u8_keys_find_insert_position_sorted(35, &keys, 3), 3);

        assert_eq!(u8_keys_position_after(None, &keys, 3), 0);
        assert_eq!(u8_keys_position_after(Some(20), &keys, 3), 2);
        assert_eq!(u8_keys_position_after(Some(30), &keys, 3), 3);
        assert_eq!(u8_keys_position_before(None, &keys, 3), 3);
        assert_eq!(u8_keys_position_before(Some(20), &keys, 3), 1);
        assert_eq!(u8_keys_position_before(Some(10), &keys, 3), 0);
    }
}
