//! PGM (P5, binary grayscale) image I/O, with each cell written as a raw
//! `0`/`1` byte rather than rescaled to a display range.
//!
//! `write_single`/`read_single` are the ordinary, one-process path used by
//! a reference run and by tests. `write_distributed`/`read_distributed`
//! emulate `MPI_File_write_at`/`MPI_File_read_at`: every worker holds its
//! own `File` handle to the same path and writes or reads only the disjoint
//! byte range covering its rectangle, so no worker ever waits on another's
//! I/O once the header is in place.

mod header;

use crate::error::{AppError, Result};
use crate::grid::PackedGrid;
use crate::transport::Communicator;
use header::{GlobalHeaderInfo, PgmHeader};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::os::unix::fs::FileExt;
use std::path::Path;

fn write_all_at(file: &File, mut buf: &[u8], mut offset: u64) -> Result<()> {
    while !buf.is_empty() {
        let n = file.write_at(buf, offset)?;
        if n == 0 {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "write_at wrote zero bytes",
            )));
        }
        buf = &buf[n..];
        offset += n as u64;
    }
    Ok(())
}

fn read_all_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> Result<()> {
    while !buf.is_empty() {
        let n = file.read_at(buf, offset)?;
        if n == 0 {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "read_at hit end of file before filling buffer",
            )));
        }
        buf = &mut buf[n..];
        offset += n as u64;
    }
    Ok(())
}

/// Writes `grid` as a standalone P5 image.
pub fn write_single<P: AsRef<Path>>(path: P, grid: &PackedGrid) -> Result<()> {
    let header = PgmHeader::new(grid.cols(), grid.rows());
    let mut file = File::create(path)?;
    file.write_all(&header.encode())?;
    for r in 0..grid.rows() as isize {
        let row: Vec<u8> = (0..grid.cols() as isize)
            .map(|c| if grid.get(r, c) { header.maxval } else { 0 })
            .collect();
        file.write_all(&row)?;
    }
    Ok(())
}

/// Reads a standalone P5 image into a freshly allocated grid. Any nonzero
/// pixel is alive.
pub fn read_single<P: AsRef<Path>>(path: P) -> Result<PackedGrid> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let (header, _offset) = PgmHeader::parse(&mut reader)?;
    let mut pixels = vec![0u8; header.width * header.height];
    reader.read_exact(&mut pixels)?;

    let mut grid = PackedGrid::new(header.height, header.width);
    for r in 0..header.height as isize {
        for c in 0..header.width as isize {
            let value = pixels[r as usize * header.width + c as usize];
            grid.set(r, c, value != 0);
        }
    }
    Ok(grid)
}

/// Writes `local`'s (unhaloed) cells into the global image at `path`,
/// positioned at `(row_offset, col_offset)` of a `global_rows x
/// global_cols` canvas. `root` creates the file and writes the header;
/// every worker, including root, then writes its own rows with
/// `write_at`. Two barriers bound the positional-write phase: one so no
/// worker writes pixel data before the header exists, one so `path` is
/// fully written before any caller treats this as complete.
pub fn write_distributed<C: Communicator>(
    path: &Path,
    local: &PackedGrid,
    global_rows: usize,
    global_cols: usize,
    row_offset: usize,
    col_offset: usize,
    comm: &C,
    root: usize,
) -> Result<()> {
    let header_payload = if comm.rank() == root {
        let header = PgmHeader::new(global_cols, global_rows);
        let encoded = header.encode();
        let file = File::create(path)?;
        write_all_at(&file, &encoded, 0)?;
        Some((encoded.len() as u64).to_le_bytes().to_vec())
    } else {
        None
    };

    let response = comm.broadcast(root, header_payload)?;
    let data_offset = u64::from_le_bytes(
        response
            .try_into()
            .map_err(|_| AppError::Transport("malformed header-offset broadcast".into()))?,
    );

    comm.barrier();

    let file = std::fs::OpenOptions::new().write(true).open(path)?;
    for r in 0..local.rows() as isize {
        let row: Vec<u8> = (0..local.cols() as isize)
            .map(|c| if local.get(r, c) { 1u8 } else { 0u8 })
            .collect();
        let global_row = row_offset + r as usize;
        let offset = data_offset + (global_row * global_cols + col_offset) as u64;
        write_all_at(&file, &row, offset)?;
    }

    comm.barrier();
    Ok(())
}

/// A worker's rectangle within the global canvas: `(rows, cols, row_offset,
/// col_offset)`.
pub type Rectangle = (usize, usize, usize, usize);

/// Reads this worker's rectangle out of the image at `path`. `root` parses
/// the header and broadcasts its global width/height; every worker then
/// calls `rectangle_of` with those dimensions to learn which bytes are its
/// own, and reads them with `read_at`. Returns the worker's grid along with
/// the global `(rows, cols)` the header declared.
pub fn read_distributed<C: Communicator>(
    path: &Path,
    comm: &C,
    root: usize,
    rectangle_of: impl FnOnce(usize, usize) -> Rectangle,
) -> Result<(PackedGrid, usize, usize)> {
    let header_payload = if comm.rank() == root {
        let file = File::open(path)?;
        let mut reader = BufReader::new(&file);
        let (header, offset) = PgmHeader::parse(&mut reader)?;
        let info = GlobalHeaderInfo {
            width: header.width,
            height: header.height,
            maxval: header.maxval,
            data_offset: offset,
        };
        Some(info.encode())
    } else {
        None
    };

    let response = comm.broadcast(root, header_payload)?;
    let info = GlobalHeaderInfo::decode(&response)?;
    let (rows, cols, row_offset, col_offset) = rectangle_of(info.height, info.width);

    comm.barrier();

    let file = File::open(path)?;
    let mut grid = PackedGrid::new(rows, cols);
    for r in 0..rows {
        let mut row = vec![0u8; cols];
        let global_row = row_offset + r;
        let offset = info.data_offset + (global_row * info.width + col_offset) as u64;
        read_all_at(&file, &mut row, offset)?;
        for (c, &value) in row.iter().enumerate() {
            grid.set(r as isize, c as isize, value != 0);
        }
    }
    Ok((grid, info.height, info.width))
}
