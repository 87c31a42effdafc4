/***************************************************************************************************
 * Copyright (c) 2024 Common Access Token Contributors
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the "Software"), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all copies or
 * substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
//! URI parsing into the component set a CATU claim matches against.

use crate::error::CatError;

/// The parsed form of an absolute URI, split into the components CATU rules can match against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UriComponents {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub query: String,
    pub parent_path: String,
    pub filename: String,
    pub stem: String,
    pub extension: String,
}

impl UriComponents {
    /// Parse an absolute URI of the form `scheme://host[:port][/path][?query][#fragment]`.
    pub fn parse(uri: &str) -> Result<UriComponents, CatError> {
        let scheme_end = uri
            .find("://")
            .ok_or(CatError::InvalidArgument("URI missing scheme separator \"://\""))?;
        let scheme = uri[..scheme_end].to_string();
        let rest = &uri[scheme_end + 3..];

        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let authority = &rest[..authority_end];
        let remainder = &rest[authority_end..];

        let (host, port) = match authority.rfind(':') {
            Some(i) => {
                let port_str = &authority[i + 1..];
                let port = port_str
                    .parse::<u16>()
                    .map_err(|_| CatError::InvalidArgument("URI port is not a valid u16"))?;
                (authority[..i].to_string(), Some(port))
            }
            None => (authority.to_string(), None),
        };

        let before_fragment = match remainder.find('#') {
            Some(i) => &remainder[..i],
            None => remainder,
        };
        let (path, query) = match before_fragment.find('?') {
            Some(i) => (before_fragment[..i].to_string(), before_fragment[i + 1..].to_string()),
            None => (before_fragment.to_string(), String::new()),
        };

        let (parent_path, filename) = match path.rfind('/') {
            Some(i) => (path[..=i].to_string(), path[i + 1..].to_string()),
            None => (String::new(), path.clone()),
        };

        let (stem, extension) = match filename.rfind('.') {
            Some(i) if i != 0 && i != filename.len() - 1 => {
                (filename[..i].to_string(), filename[i + 1..].to_string())
            }
            _ => (filename.clone(), String::new()),
        };

        Ok(UriComponents {
            scheme,
            host,
            port,
            path,
            query,
            parent_path,
            filename,
            stem,
            extension,
        })
    }

    /// The string value a given URI-component key compares against. Port is stringified to its
    /// decimal representation, since CATU match rules operate on text.
    pub fn component_value(&self, key: crate::claims::labels::UriComponentKey) -> String {
        use crate::claims::labels::UriComponentKey::*;
        match key {
            Scheme => self.scheme.clone(),
            Host => self.host.clone(),
            Port => self.port.map(|p| p.to_string()).unwrap_or_default(),
            Path => self.path.clone(),
            Query => self.query.clone(),
            ParentPath => self.parent_path.clone(),
            Filename => self.filename.clone(),
            Stem => self.stem.clone(),
            Extension => self.extension.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::labels::UriComponentKey;

    #[test]
    fn parses_full_uri() {
        let u = UriComponents::parse("https://api.example.com:8443/v1/segments/a.tar.gz?x=1").unwrap();
        assert_eq!(u.scheme, "https");
        assert_eq!(u.host, "api.example.com");
        assert_eq!(u.port, Some(8443));
        assert_eq!(u.path, "/v1/segments/a.tar.gz");
        assert_eq!(u.query, "x=1");
        assert_eq!(u.parent_path, "/v1/segments/");
        assert_eq!(u.filename, "a.tar.gz");
        assert_eq!(u.stem, "a.tar");
        assert_eq!(u.extension, "gz");
    }

    #[test]
    fn filename_without_dot_has_no_extension() {
        let u = UriComponents::parse("https://host/path/README").unwrap();
        assert_eq!(u.filename, "README");
        assert_eq!(u.stem, "README");
        assert_eq!(u.extension, "");
    }

    #[test]
    fn dotfile_is_not_split_as_extension() {
        let u = UriComponents::parse("https://host/.env").unwrap();
        assert_eq!(u.filename, ".env");
        assert_eq!(u.stem, ".env");
        assert_eq!(u.extension, "");
    }

    #[test]
    fn port_stringifies_for_matching() {
        let u = UriComponents::parse("https://host:8443/").unwrap();
        assert_eq!(u.component_value(UriComponentKey::Port), "8443");
    }

    #[test]
    fn rejects_uri_without_scheme_separator() {
        assert!(UriComponents::parse("not-a-uri").is_err());
    }
}
