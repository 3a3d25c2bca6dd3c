/// Byte-exact round trips of unmodified documents
use crate::*;

const OPENAPI: &str = r#"# Pet store API
openapi: 3.0.3
info:
  title: "Swagger Petstore"   # display name
  version: '1.0.0'
  description: |
    Multi-line description
    with a second line

    and a paragraph.
  license: {name: MIT, url: "https://opensource.org/licenses/MIT"}

servers:
- url: http://petstore.swagger.io/v1
tags: [pets, store]

paths:
  /pets:
    get:
      summary: List all pets
      operationId: listPets
      tags:
        - pets
      parameters:
        # paging
        - name: limit
          in: query
          required: false
          schema:
            type: integer
            format: int32
      responses:
        '200':
          description: A paged array of pets
        default:
          $ref: '#/components/responses/Error'
components:
  schemas:
    Pet: &pet
      type: object
      required: [id, name]
    Pets:
      type: array
      items: *pet
"#;

fn assert_roundtrip(source: &str) {
    let doc = parse(source).unwrap_or_else(|e| panic!("Failed to parse {:?}: {}", source, e));
    let output = serialize(&doc);
    assert_eq!(output, source, "round trip changed the text");
}

#[test]
fn test_roundtrip_openapi_document() {
    assert_roundtrip(OPENAPI);
}

#[test]
fn test_openapi_document_value() {
    let doc = parse(OPENAPI).unwrap();
    let value = doc.to_value();

    assert_eq!(value["openapi"], "3.0.3");
    assert_eq!(value["info"]["title"], "Swagger Petstore");
    assert_eq!(
        value["info"]["description"],
        "Multi-line description\nwith a second line\n\nand a paragraph.\n"
    );
    assert_eq!(value["servers"][0]["url"], "http://petstore.swagger.io/v1");
    assert_eq!(value["paths"]["/pets"]["get"]["parameters"][0]["schema"]["format"], "int32");
    assert_eq!(value["paths"]["/pets"]["get"]["responses"]["200"]["description"], "A paged array of pets");
    assert_eq!(value["components"]["schemas"]["Pets"]["items"]["required"][1], "name");
}

#[test]
fn test_roundtrip_formatting_variants() {
    let sources = [
        "",
        "\n",
        "# just a comment",
        "key: value",
        "key:    spaced   # comment\n",
        "a:\n    b:\n        c: 1\n",
        "list:\n- one\n-   two\n- three # 3\n",
        "nested:\n  -   - x\n      - y\n",
        "empty_map: {}\nempty_list: []\nnothing:\nnull_value: ~\n",
        "text: >\n  folded\n  lines\n\nnext: 1\n",
        "keep: |+\n  kept\n\n",
        "strip: |-\n  stripped\n",
        "indented: |2\n    two extra\n",
        "quoted: 'it''s'\ndouble: \"a\\tb\"\n",
        "multi: \"first\n  second\"\n",
        "plain: first\n  second\n",
        "flow: [a, {b: c}, [d]]\n",
        "flow_multi: {\n  a: 1,\n  b: 2\n}\n",
        "anchored: &a !custom value\nref: *a\n",
        "crlf: true\r\nother: 1\r\n",
        "%YAML 1.2\n---\ndoc: 1\n...\n",
        "\n\n# spaced\n\nkey: 1\n\n# trailing\n",
        "- a\n- b: 1\n  c: 2\n-\n  d: 3\n",
        "'quoted key': 1\n\"double key\": 2\n",
        "no_final_newline: true",
        "mixed: 1\r\nendings: 2\nhere: 3\r\n",
        "\u{feff}bom: true\n",
        "...\n",
        "  1%",
        "merge: &m {a: 1}\nuse:\n  <<: *m\n  b: 2\n",
    ];

    for source in sources {
        assert_roundtrip(source);
    }
}

#[test]
fn test_roundtrip_after_value_equal_reparse() {
    let doc = parse(OPENAPI).unwrap();
    let reparsed = parse(&serialize(&doc)).unwrap();
    assert!(values_equal(&doc.to_value(), &reparsed.to_value()));
}
