//! Iterative pre-pass over untrusted input
//!
//! Domain decoders are plain recursive descent. Before any of them runs, the
//! input is walked once with an explicit stack, which validates the framing of
//! every item and bounds the nesting depth without touching the call stack or
//! allocating per item.

use minicbor::data::Type;
use minicbor::Decoder;

use crate::Error;

enum Frame {
    /// items still expected by a definite length container (or a tag)
    Definite(u64),
    /// open until a break byte shows up
    Indefinite,
}

fn read_head(d: &mut Decoder<'_>, datatype: Type) -> Result<Option<Frame>, minicbor::decode::Error> {
    let frame = match datatype {
        Type::Array => d.array()?.map(Frame::Definite),
        Type::ArrayIndef => {
            d.array()?;
            Some(Frame::Indefinite)
        }
        Type::Map => {
            let pairs = d.map()?.unwrap_or_default();
            let items = pairs
                .checked_mul(2)
                .ok_or_else(|| minicbor::decode::Error::message("map length overflow"))?;
            Some(Frame::Definite(items))
        }
        Type::MapIndef => {
            d.map()?;
            Some(Frame::Indefinite)
        }
        Type::Tag => {
            d.tag()?;
            Some(Frame::Definite(1))
        }
        Type::BytesIndef => {
            for chunk in d.bytes_iter()? {
                chunk?;
            }
            None
        }
        Type::StringIndef => {
            for chunk in d.str_iter()? {
                chunk?;
            }
            None
        }
        _ => {
            d.skip()?;
            None
        }
    };

    Ok(frame)
}

/// Walks exactly one cbor item and returns the offset right after it
///
/// Fails with [`Error::TooDeep`] as soon as more than `max_depth` containers
/// (arrays, maps or tags) are open at the same time, and with
/// [`Error::Decode`] on malformed or truncated input.
pub fn check_nesting(input: &[u8], max_depth: usize) -> Result<usize, Error> {
    let mut d = Decoder::new(input);
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        let offset = d.position();
        let datatype = d.datatype().map_err(|e| Error::decode(offset, e))?;

        if matches!(datatype, Type::Break) {
            match stack.pop() {
                Some(Frame::Indefinite) => d.set_position(offset + 1),
                _ => {
                    let err = minicbor::decode::Error::message("unexpected break");
                    return Err(Error::decode(offset, err));
                }
            }
        } else {
            if let Some(Frame::Definite(remaining)) = stack.last_mut() {
                *remaining -= 1;
            }

            let frame = read_head(&mut d, datatype).map_err(|e| Error::decode(offset, e))?;

            if let Some(frame) = frame {
                stack.push(frame);

                if stack.len() > max_depth {
                    return Err(Error::TooDeep(max_depth));
                }
            }
        }

        while matches!(stack.last(), Some(Frame::Definite(0))) {
            stack.pop();
        }

        if stack.is_empty() {
            return Ok(d.position());
        }
    }
}
