// This code is part of Qiskit.
//
// (C) Copyright IBM 2023
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

/// Run `worker` inside a freshly built, scoped Rayon pool with `num_threads` threads.
///
/// Tests that need to exercise the threaded reconstruction path use this so that they do not
/// depend on the size (or prior use) of the global pool, and so that no global worker threads
/// outlive the test under Miri.
pub fn in_scoped_thread_pool<F, T>(
    num_threads: usize,
    worker: F,
) -> Result<T, ::rayon::ThreadPoolBuildError>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    ::rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_scoped(::rayon::ThreadBuilder::run, |pool| pool.install(worker))
}
