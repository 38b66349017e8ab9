// Reference index, every inserted (key, value) is kept under its key,
// in insertion order.
struct RefNodes {
    entries: BTreeMap<u64, Vec<i64>>,
}

impl RefNodes {
    fn new() -> RefNodes {
        RefNodes {
            entries: BTreeMap::new(),
        }
    }

    fn insert(&mut self, key: u64, value: i64) {
        self.entries.entry(key).or_insert_with(Vec::new).push(value);
    }

    fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    // highest key <= `key`.
    fn floor(&self, key: u64) -> Option<u64> {
        self.entries.range(..=key).next_back().map(|(k, _)| *k)
    }

    fn values(&self, key: u64) -> &[i64] {
        self.entries.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    // all keys in sort order, repeated for every duplicate.
    fn keys(&self) -> Vec<u64> {
        self.entries
            .iter()
            .flat_map(|(k, vs)| std::iter::repeat(*k).take(vs.len()))
            .collect()
    }
}

fn in_order<V>(node: Option<&Node<V>>, acc: &mut Vec<u64>) {
    if let Some(node) = node {
        in_order(node.left_deref(), acc);
        acc.push(node.key());
        in_order(node.right_deref(), acc);
    }
}

// 2 * ceil(log2(n + 1))
fn height_bound(n: usize) -> usize {
    2 * (64 - (n as u64).leading_zeros()) as usize
}
