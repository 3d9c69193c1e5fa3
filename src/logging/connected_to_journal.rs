// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

// Original code found here:
// https://github.com/swsnr/systemd-journal-logger.rs/blob/v2.2.1/src/lib.rs#L76

use std::{ffi::OsStr, fmt::Display, os::fd::AsFd};

/// Whether `stream` of the current process is a stream opened by the systemd journal.
///
/// systemd exports `$JOURNAL_STREAM` as `<device>:<inode>` of the stream it connects to
/// stdout and stderr (see `systemd.exec(5)`). Redirecting `stream` elsewhere breaks the match.
pub fn connected_to_journal(stream: impl AsFd) -> bool {
    let Ok(stat) = rustix::fs::fstat(stream.as_fd()) else {
        return false;
    };
    std::env::var_os("JOURNAL_STREAM")
        .is_some_and(|stream| names_stream(&stream, stat.st_dev, stat.st_ino))
}

fn names_stream(journal_stream: &OsStr, device: impl Display, inode: impl Display) -> bool {
    journal_stream.to_string_lossy() == format!("{device}:{inode}")
}
