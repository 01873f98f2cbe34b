// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

#[cfg(test)]
mod fill_bytes_with_pattern_tests {
    use rampart_util::fill_bytes_with_pattern;

    #[test]
    fn test_fill_bytes_with_pattern_zeros() {
        let mut buf = [0xFFu8; 16];
        fill_bytes_with_pattern(&mut buf, 0x00);
        assert!(buf.iter().all(|&b| b == 0x00));
    }

    #[test]
    fn test_fill_bytes_with_pattern_poison() {
        let mut buf = [0x00u8; 32];
        fill_bytes_with_pattern(&mut buf, 0xAA);
        assert!(buf.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_fill_bytes_with_pattern_empty_slice() {
        let mut buf: [u8; 0] = [];
        fill_bytes_with_pattern(&mut buf, 0xFF);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_fill_bytes_with_pattern_only_touches_given_range() {
        let mut buf = [0x11u8; 8];
        fill_bytes_with_pattern(&mut buf[2..5], 0xAA);
        assert_eq!(buf, [0x11, 0x11, 0xAA, 0xAA, 0xAA, 0x11, 0x11, 0x11]);
    }
}
