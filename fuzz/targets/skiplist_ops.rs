#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rankskip::{SkipList, SkipListError};

#[derive(Debug, Arbitrary)]
enum Op {
    Add(i8),
    Remove(i8),
    DeleteAt(i16),
    Get(i16),
    IndexOf(i8),
    Preen,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    seed: u64,
    ops: Vec<Op>,
}

fn resolve(
    rank: isize,
    len: usize,
) -> Option<usize> {
    let resolved = if rank < 0 { rank + len as isize } else { rank };
    (0..len as isize).contains(&resolved).then_some(resolved as usize)
}

fuzz_target!(|input: FuzzInput| {
    let mut sl = SkipList::with_seed(input.seed);
    let mut model: Vec<i8> = Vec::new();

    for op in input.ops {
        match op {
            Op::Add(v) => {
                sl.add(v);
                let pos = model.partition_point(|x| *x <= v);
                model.insert(pos, v);
            }
            Op::Remove(v) => {
                let pos = model.partition_point(|x| *x < v);
                let expected = match model.get(pos) {
                    Some(x) if *x == v => Ok(model.remove(pos)),
                    _ => Err(SkipListError::NotFound),
                };
                assert_eq!(sl.remove(&v), expected);
            }
            Op::DeleteAt(rank) => {
                let rank = rank as isize;
                let expected = match resolve(rank, model.len()) {
                    Some(i) => Ok(model.remove(i)),
                    None => Err(SkipListError::OutOfRange {
                        index: rank,
                        len: model.len(),
                    }),
                };
                assert_eq!(sl.delete_at(rank), expected);
            }
            Op::Get(rank) => {
                let rank = rank as isize;
                let expected = resolve(rank, model.len()).map(|i| model[i]);
                assert_eq!(sl.get(rank).ok().copied(), expected);
            }
            Op::IndexOf(v) => {
                let pos = model.partition_point(|x| *x < v);
                let expected = model.get(pos).filter(|x| **x == v).map(|_| pos);
                assert_eq!(sl.index_of(&v).ok(), expected);
            }
            Op::Preen => sl.preen(),
        }
    }

    assert_eq!(sl.len(), model.len());
    assert!(sl.iter().eq(model.iter()));
    // Основной инвариант - структура уровней согласована после любой истории.
    assert!(sl.validate_invariants().is_ok());
});
