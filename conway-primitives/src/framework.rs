use conway_codec::minicbor::{self, data::Type};
use conway_crypto::hash::Hash;

/// Digest of a ledger value, the way the ledger derives its identifier
pub trait ToHash<const BYTES: usize> {
    fn to_hash(&self) -> Result<Hash<BYTES>, conway_codec::Error>;
}

/// Header of a `[discriminant, ...fields]` tuple being decoded
///
/// The arity of a definite array is checked as soon as the variant is known,
/// before any field is read; an indefinite one must close right after the
/// last field.
pub(crate) struct Tuple {
    schema: &'static str,
    position: usize,
    len: Option<u64>,
}

impl Tuple {
    pub fn begin(
        d: &mut minicbor::Decoder<'_>,
        schema: &'static str,
    ) -> Result<Self, minicbor::decode::Error> {
        let position = d.position();
        let len = d.array()?;

        Ok(Self {
            schema,
            position,
            len,
        })
    }

    pub fn discriminant(
        &self,
        d: &mut minicbor::Decoder<'_>,
    ) -> Result<u64, minicbor::decode::Error> {
        if self.len == Some(0) {
            return Err(self.error("empty array has no discriminant"));
        }

        d.u64()
    }

    /// `arity` counts every element, the discriminant included
    pub fn arity(&self, arity: u64) -> Result<(), minicbor::decode::Error> {
        match self.len {
            Some(n) if n != arity => Err(self.error(format!(
                "expected {arity} elements, found {n}"
            ))),
            _ => Ok(()),
        }
    }

    pub fn unknown(&self, discriminant: u64) -> minicbor::decode::Error {
        self.error(format!("unknown discriminant {discriminant}"))
    }

    pub fn end(self, d: &mut minicbor::Decoder<'_>) -> Result<(), minicbor::decode::Error> {
        if self.len.is_some() {
            return Ok(());
        }

        match d.datatype()? {
            Type::Break => {
                d.set_position(d.position() + 1);
                Ok(())
            }
            _ => Err(self.error("unexpected extra elements")),
        }
    }

    fn error(&self, msg: impl std::fmt::Display) -> minicbor::decode::Error {
        minicbor::decode::Error::message(format!("{}: {msg}", self.schema)).at(self.position)
    }
}

/// Layout of a record map as it was received: key order and framing
///
/// Keeping it lets a decoded record encode back to the same bytes, which is
/// what hashes and signatures over the record are computed on. Records built
/// locally carry the default layout and write a definite map with ascending
/// keys. Layouts never take part in equality.
#[derive(Debug, Clone, Default)]
pub struct KeyOrder {
    keys: Vec<u64>,
    indefinite: bool,
}

impl KeyOrder {
    pub fn is_indefinite(&self) -> bool {
        self.indefinite
    }

    /// Received keys first in their received order, then any other present
    /// keys in ascending order
    fn arrange(&self, present: &[u64]) -> Vec<u64> {
        let mut out: Vec<u64> = self
            .keys
            .iter()
            .copied()
            .filter(|k| present.contains(k))
            .collect();

        let mut rest: Vec<u64> = present.iter().copied().filter(|k| !out.contains(k)).collect();
        rest.sort_unstable();
        out.extend(rest);

        out
    }
}

impl PartialEq for KeyOrder {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for KeyOrder {}

/// Writes a sparse record map, `field` is called once per present key right
/// after the key itself
pub(crate) fn encode_record<W, F>(
    e: &mut minicbor::Encoder<W>,
    layout: &KeyOrder,
    present: &[u64],
    mut field: F,
) -> Result<(), minicbor::encode::Error<W::Error>>
where
    W: minicbor::encode::Write,
    F: FnMut(u64, &mut minicbor::Encoder<W>) -> Result<(), minicbor::encode::Error<W::Error>>,
{
    let keys = layout.arrange(present);

    if layout.indefinite {
        e.begin_map()?;
    } else {
        e.map(keys.len() as u64)?;
    }

    for key in keys {
        e.u64(key)?;
        field(key, e)?;
    }

    if layout.indefinite {
        e.end()?;
    }

    Ok(())
}

/// Reader over the integer keys of a sparse record map
///
/// Keys must be below 64 and appear at most once. A definite map ends after
/// its declared count, an indefinite one at its Break.
pub(crate) struct Fields {
    schema: &'static str,
    len: Option<u64>,
    read: u64,
    seen: u64,
    order: Vec<u64>,
    key_position: usize,
}

impl Fields {
    pub fn begin(
        d: &mut minicbor::Decoder<'_>,
        schema: &'static str,
    ) -> Result<Self, minicbor::decode::Error> {
        let key_position = d.position();
        let len = d.map()?;

        Ok(Self {
            schema,
            len,
            read: 0,
            seen: 0,
            order: Vec::new(),
            key_position,
        })
    }

    /// Next key of the map, `None` once every entry has been read
    pub fn next_key(
        &mut self,
        d: &mut minicbor::Decoder<'_>,
    ) -> Result<Option<u64>, minicbor::decode::Error> {
        match self.len {
            Some(n) if self.read >= n => return Ok(None),
            None if d.datatype()? == Type::Break => {
                d.set_position(d.position() + 1);
                return Ok(None);
            }
            _ => (),
        }

        self.key_position = d.position();
        let key = d.u64()?;
        self.read += 1;

        if key >= 64 {
            return Err(self.unknown(key));
        }

        let bit = 1u64 << key;

        if self.seen & bit != 0 {
            return Err(self.error(format!("duplicate key {key}")));
        }

        self.seen |= bit;
        self.order.push(key);

        Ok(Some(key))
    }

    pub fn unknown(&self, key: u64) -> minicbor::decode::Error {
        self.error(format!("unknown key {key}"))
    }

    /// Unwraps a field that the record can't be built without
    pub fn required<T>(&self, value: Option<T>, name: &str) -> Result<T, minicbor::decode::Error> {
        value.ok_or_else(|| self.error(format!("field {name} is required")))
    }

    /// The layout read so far, complete once `next_key` returned `None`
    pub fn layout(&self) -> KeyOrder {
        KeyOrder {
            keys: self.order.clone(),
            indefinite: self.len.is_none(),
        }
    }

    fn error(&self, msg: impl std::fmt::Display) -> minicbor::decode::Error {
        minicbor::decode::Error::message(format!("{}: {msg}", self.schema)).at(self.key_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(bytes: &[u8]) -> Result<(u64, u64), minicbor::decode::Error> {
        let mut d = minicbor::Decoder::new(bytes);
        let tuple = Tuple::begin(&mut d, "Pair")?;

        match tuple.discriminant(&mut d)? {
            0 => {
                tuple.arity(2)?;
                let x = d.u64()?;
                tuple.end(&mut d)?;
                Ok((0, x))
            }
            x => Err(tuple.unknown(x)),
        }
    }

    #[test]
    fn definite_and_indefinite_tuples() {
        assert_eq!(pair(&hex::decode("820007").unwrap()).unwrap(), (0, 7));
        assert_eq!(pair(&hex::decode("9f0007ff").unwrap()).unwrap(), (0, 7));
    }

    #[test]
    fn arity_is_checked() {
        let err = pair(&hex::decode("83000707").unwrap()).unwrap_err();
        assert!(err.to_string().contains("Pair: expected 2 elements, found 3"));

        assert!(pair(&hex::decode("9f000707ff").unwrap()).is_err());
        assert!(pair(&hex::decode("80").unwrap()).is_err());
    }

    #[test]
    fn unknown_discriminant() {
        let err = pair(&hex::decode("820907").unwrap()).unwrap_err();
        assert!(err.to_string().contains("unknown discriminant 9"));
    }

    fn keys(bytes: &[u8]) -> Result<Vec<(u64, u64)>, minicbor::decode::Error> {
        let mut d = minicbor::Decoder::new(bytes);
        let mut fields = Fields::begin(&mut d, "Record")?;
        let mut out = vec![];

        while let Some(key) = fields.next_key(&mut d)? {
            match key {
                0..=3 => out.push((key, d.u64()?)),
                x => return Err(fields.unknown(x)),
            }
        }

        fields.required(out.first().copied(), "first")?;

        Ok(out)
    }

    #[test]
    fn sparse_map_keys() {
        assert_eq!(
            keys(&hex::decode("a200010302").unwrap()).unwrap(),
            vec![(0, 1), (3, 2)]
        );
        assert_eq!(
            keys(&hex::decode("bf00010302ff").unwrap()).unwrap(),
            vec![(0, 1), (3, 2)]
        );
    }

    fn relayout(bytes: &[u8], present: &[u64]) -> String {
        let mut d = minicbor::Decoder::new(bytes);
        let mut fields = Fields::begin(&mut d, "Record").unwrap();
        while fields.next_key(&mut d).unwrap().is_some() {
            d.skip().unwrap();
        }

        let mut e = minicbor::Encoder::new(Vec::new());
        encode_record(&mut e, &fields.layout(), present, |key, e| {
            e.u64(key * 10)?;
            Ok(())
        })
        .unwrap();

        hex::encode(e.into_writer())
    }

    #[test]
    fn layout_keeps_received_order() {
        // {3: _, 0: _}
        assert_eq!(relayout(&hex::decode("a203000000").unwrap(), &[0, 3]), "a2031e0000");

        // an indefinite map stays indefinite
        assert_eq!(
            relayout(&hex::decode("bf03000000ff").unwrap(), &[0, 3]),
            "bf031e0000ff"
        );

        // keys added later go after the received ones, dropped ones disappear
        assert_eq!(
            relayout(&hex::decode("a203000000").unwrap(), &[0, 1, 2]),
            "a30000010a0214"
        );
    }

    #[test]
    fn fresh_layout_is_ascending() {
        let mut e = minicbor::Encoder::new(Vec::new());
        encode_record(&mut e, &KeyOrder::default(), &[5, 1], |_, e| {
            e.null()?;
            Ok(())
        })
        .unwrap();

        assert_eq!(hex::encode(e.into_writer()), "a201f605f6");
    }

    #[test]
    fn sparse_map_rejects_duplicates_and_unknown_keys() {
        let err = keys(&hex::decode("a200010002").unwrap()).unwrap_err();
        assert!(err.to_string().contains("Record: duplicate key 0"));

        let err = keys(&hex::decode("a1070a").unwrap()).unwrap_err();
        assert!(err.to_string().contains("Record: unknown key 7"));

        let err = keys(&hex::decode("a0").unwrap()).unwrap_err();
        assert!(err.to_string().contains("field first is required"));
    }
}
