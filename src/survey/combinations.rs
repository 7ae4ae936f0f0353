/// k-element combinations of a slice in lexicographic index order:
/// `[A, B, C]` taken 2 at a time yields `[A, B]`, `[A, C]`, `[B, C]`.
pub struct Combinations<'a, T> {
    pool: &'a [T],
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl<'a, T> Combinations<'a, T> {
    pub fn new(pool: &'a [T], k: usize) -> Self {
        Self {
            pool,
            indices: (0..k).collect(),
            started: false,
            done: k > pool.len(),
        }
    }

    fn current(&self) -> Vec<&'a T> {
        self.indices.iter().map(|&i| &self.pool[i]).collect()
    }
}

impl<'a, T> Iterator for Combinations<'a, T> {
    type Item = Vec<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.current());
        }

        let n = self.pool.len();
        let k = self.indices.len();

        // Rightmost index that can still move right.
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                return None;
            }
            i -= 1;
            if self.indices[i] != i + n - k {
                break;
            }
        }

        self.indices[i] += 1;
        for j in i + 1..k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        Some(self.current())
    }
}

/// C(n, k), saturating at `u64::MAX`.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k) as u64;
    let n = n as u64;
    let mut result: u64 = 1;
    for i in 0..k {
        // result * (n - i) is always divisible by (i + 1) at this point
        result = match result.checked_mul(n - i) {
            Some(v) => v / (i + 1),
            None => return u64::MAX,
        };
    }
    result
}
