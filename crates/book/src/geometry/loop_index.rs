//! Index arithmetic for closed loops (rings of vertices, circular buffers).

/// Index after `index` in a loop of `count` items.
#[inline]
pub fn next(index: usize, count: usize) -> usize {
    let index = index + 1;
    if index == count { 0 } else { index }
}

/// Index before `index` in a loop of `count` items.
#[inline]
pub fn prev(index: usize, count: usize) -> usize {
    if index == 0 { count - 1 } else { index - 1 }
}

/// Wrap any signed index into `[0, count)` using floor modulo.
#[inline]
pub fn wrap(index: i32, count: usize) -> usize {
    index.rem_euclid(count as i32) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_prev_wrap_around() {
        assert_eq!(next(3, 4), 0);
        assert_eq!(next(1, 4), 2);
        assert_eq!(prev(0, 4), 3);
        assert_eq!(prev(2, 4), 1);
    }

    #[test]
    fn test_wrap_negative() {
        assert_eq!(wrap(-1, 5), 4);
        assert_eq!(wrap(-6, 5), 4);
        assert_eq!(wrap(7, 5), 2);
    }
}
