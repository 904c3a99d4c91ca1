// File: src/stack.rs
//
// Stack growth for the recursive parser and evaluator.
//
// Deeply nested expressions and deep (but finite) recursion in Sprout programs
// turn into deep native recursion. Wrapping each recursive step lets the stack
// grow on the heap instead of overflowing.

/// Grow the stack when less than this remains
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, first growing the stack if it is close to running out
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_native_recursion_does_not_overflow() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }
        assert_eq!(depth(100_000), 100_000);
    }
}
