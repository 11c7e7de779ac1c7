//! In-process stand-in for the native function table
//!
//! Contexts are heap-allocated `FakeContext`s tagged with a unique id so
//! tests can check which contexts were freed without depending on address
//! reuse across parallel tests.

use chromabind::ffi::chromaprint::ContextPtr;
use chromabind::{NativeApi, NativeHandle};
use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

struct FakeContext {
    id: u64,
    algorithm: c_int,
    started: bool,
    finished: bool,
    samples: Vec<i16>,
}

enum Allocation {
    Text,
    Words { len: usize },
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);
static FREED: Mutex<Vec<u64>> = Mutex::new(Vec::new());
static ALLOCATIONS: Mutex<Vec<(usize, Allocation)>> = Mutex::new(Vec::new());
static UNENCODABLE_FREES: AtomicUsize = AtomicUsize::new(0);

/// Address just above the positive `i64` range
#[cfg(target_pointer_width = "64")]
pub const UNENCODABLE_ADDRESS: usize = 1 << 63;

unsafe fn context<'a>(ctx: ContextPtr) -> &'a mut FakeContext {
    &mut *(ctx as *mut FakeContext)
}

unsafe extern "C" fn fake_new(algorithm: c_int) -> ContextPtr {
    let ctx = Box::new(FakeContext {
        id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
        algorithm,
        started: false,
        finished: false,
        samples: Vec::new(),
    });
    Box::into_raw(ctx) as ContextPtr
}

unsafe extern "C" fn failing_new(_algorithm: c_int) -> ContextPtr {
    ptr::null_mut()
}

unsafe extern "C" fn fake_free(ctx: ContextPtr) {
    if ctx.is_null() {
        return;
    }
    let ctx = Box::from_raw(ctx as *mut FakeContext);
    FREED.lock().unwrap().push(ctx.id);
}

#[cfg(target_pointer_width = "64")]
unsafe extern "C" fn unencodable_new(_algorithm: c_int) -> ContextPtr {
    UNENCODABLE_ADDRESS as ContextPtr
}

#[cfg(target_pointer_width = "64")]
unsafe extern "C" fn unencodable_free(ctx: ContextPtr) {
    if ctx as usize == UNENCODABLE_ADDRESS {
        UNENCODABLE_FREES.fetch_add(1, Ordering::SeqCst);
    } else {
        fake_free(ctx);
    }
}

unsafe extern "C" fn fake_get_algorithm(ctx: ContextPtr) -> c_int {
    context(ctx).algorithm
}

unsafe extern "C" fn fake_start(
    ctx: ContextPtr,
    _sample_rate: c_int,
    _num_channels: c_int,
) -> c_int {
    let ctx = context(ctx);
    ctx.started = true;
    ctx.finished = false;
    ctx.samples.clear();
    1
}

unsafe extern "C" fn rejecting_start(
    _ctx: ContextPtr,
    _sample_rate: c_int,
    _num_channels: c_int,
) -> c_int {
    0
}

unsafe extern "C" fn fake_feed(ctx: ContextPtr, data: *const i16, size: c_int) -> c_int {
    let ctx = context(ctx);
    if !ctx.started || size < 0 {
        return 0;
    }
    if size > 0 {
        ctx.samples
            .extend_from_slice(std::slice::from_raw_parts(data, size as usize));
    }
    1
}

unsafe extern "C" fn fake_finish(ctx: ContextPtr) -> c_int {
    let ctx = context(ctx);
    if !ctx.started {
        return 0;
    }
    ctx.finished = true;
    1
}

fn checksum(samples: &[i16]) -> u32 {
    samples
        .iter()
        .fold(0u32, |acc, &s| acc.wrapping_mul(31).wrapping_add(s as u16 as u32))
}

unsafe extern "C" fn fake_get_fingerprint(
    ctx: ContextPtr,
    fingerprint: *mut *mut c_char,
) -> c_int {
    let ctx = context(ctx);
    if !ctx.finished {
        return 0;
    }
    let text = format!(
        "AQAA{}{:08X}{:04X}",
        ctx.algorithm,
        checksum(&ctx.samples),
        ctx.samples.len()
    );
    let raw = CString::new(text).unwrap().into_raw();
    ALLOCATIONS
        .lock()
        .unwrap()
        .push((raw as usize, Allocation::Text));
    *fingerprint = raw;
    1
}

unsafe extern "C" fn fake_get_raw_fingerprint(
    ctx: ContextPtr,
    fingerprint: *mut *mut u32,
    size: *mut c_int,
) -> c_int {
    let ctx = context(ctx);
    if !ctx.finished {
        return 0;
    }
    let words: Box<[u32]> = vec![
        ctx.algorithm as u32,
        checksum(&ctx.samples),
        ctx.samples.len() as u32,
    ]
    .into_boxed_slice();
    let len = words.len();
    let raw = Box::into_raw(words) as *mut u32;
    ALLOCATIONS
        .lock()
        .unwrap()
        .push((raw as usize, Allocation::Words { len }));
    *fingerprint = raw;
    *size = len as c_int;
    1
}

unsafe extern "C" fn fake_dealloc(ptr: *mut c_void) {
    let entry = {
        let mut allocations = ALLOCATIONS.lock().unwrap();
        allocations
            .iter()
            .position(|(address, _)| *address == ptr as usize)
            .map(|index| allocations.swap_remove(index))
    };

    match entry {
        Some((_, Allocation::Text)) => drop(CString::from_raw(ptr as *mut c_char)),
        Some((_, Allocation::Words { len })) => drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
            ptr as *mut u32,
            len,
        ))),
        None => panic!("dealloc of unknown pointer {:p}", ptr),
    }
}

unsafe extern "C" fn fake_get_version() -> *const c_char {
    c"1.5.1-fake".as_ptr()
}

/// Well-behaved native table
pub fn fake_api() -> NativeApi {
    NativeApi {
        new: fake_new,
        free: fake_free,
        get_algorithm: fake_get_algorithm,
        start: fake_start,
        feed: fake_feed,
        finish: fake_finish,
        get_fingerprint: fake_get_fingerprint,
        get_raw_fingerprint: fake_get_raw_fingerprint,
        dealloc: fake_dealloc,
        get_version: fake_get_version,
    }
}

/// Table whose constructor always returns null
pub fn failing_api() -> NativeApi {
    NativeApi {
        new: failing_new,
        ..fake_api()
    }
}

/// Table whose `start` always reports failure
pub fn rejecting_api() -> NativeApi {
    NativeApi {
        start: rejecting_start,
        ..fake_api()
    }
}

/// Table whose constructor returns an address no `i64` can hold
#[cfg(target_pointer_width = "64")]
pub fn unencodable_api() -> NativeApi {
    NativeApi {
        new: unencodable_new,
        free: unencodable_free,
        ..fake_api()
    }
}

/// How many times the unencodable context has been freed
pub fn unencodable_free_count() -> usize {
    UNENCODABLE_FREES.load(Ordering::SeqCst)
}

/// Id of the live fake context behind `handle`
pub fn context_id(handle: NativeHandle) -> u64 {
    unsafe { context(handle.as_ptr()).id }
}

/// How many times the context with `id` has been freed
pub fn free_count(id: u64) -> usize {
    FREED.lock().unwrap().iter().filter(|&&freed| freed == id).count()
}
