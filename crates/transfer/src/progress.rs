/// Percent complete after chunk `index` of `total_chunks` has been sent,
/// rounded half up.
///
/// Only the final chunk reports 100; earlier chunks are capped at 99 so a
/// later failure never leaves a file looking complete.
pub fn chunk_progress(index: usize, total_chunks: usize) -> u8 {
    if total_chunks == 0 {
        return 100;
    }
    let done = (index + 1).min(total_chunks) as u64;
    let total = total_chunks as u64;
    let percent = ((done * 200 + total) / (total * 2)) as u8;
    if done < total { percent.min(99) } else { percent }
}
