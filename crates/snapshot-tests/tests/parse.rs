use snapshot_tests::{invalid, valid};

valid!(
    globals_and_sections,
    "name = demo\ncount = 3\n\n[server]\nhost = example.org\nport=8080\n",
    @r"
section `` 1:1
  key `name` 1:1 = `demo` 1:8
  key `count` 2:1 = `3` 2:9
section `server` 4:2
  key `host` 5:1 = `example.org` 5:8
  key `port` 6:1 = `8080` 6:6
"
);

valid!(
    labels_and_bare_keys,
    "; leading comment\n[ server : primary ]\nenabled\n# note\ntimeout =\n[server:backup]\nweight = 2\n",
    @r"
section `` 1:1
section `server` 2:3 label `primary` 2:12
  key `enabled` 3:1
  key `timeout` 5:1 = `` 5:10
section `server` 6:2 label `backup` 6:9
  key `weight` 7:1 = `2` 7:10
"
);

valid!(
    values_run_to_end_of_line,
    "cmd = a = b  # not a comment\npath=/usr/lib;/lib\n",
    @r"
section `` 1:1
  key `cmd` 1:1 = `a = b  # not a comment` 1:7
  key `path` 2:1 = `/usr/lib;/lib` 2:6
"
);

valid!(
    no_trailing_newline,
    "[a.b-c_d]\nkey.1 = x",
    @r"
section `` 1:1
section `a.b-c_d` 1:2
  key `key.1` 2:1 = `x` 2:9
"
);

invalid!(
    unterminated_header,
    "[server\nport = 1\n",
    @r"
unterminated_header.ini:1:8: error: invalid syntax
    [server
           ^
showing 1 error
"
);

invalid!(
    space_inside_key,
    "a = 1\nbad key = 2\n",
    @r"
space_inside_key.ini:2:5: error: invalid syntax
    bad key = 2
        ^
showing 1 error
"
);

invalid!(
    text_after_header,
    "[a] x\n",
    @r"
text_after_header.ini:1:5: error: invalid syntax
    [a] x
        ^
showing 1 error
"
);

invalid!(
    header_cut_off_by_eof,
    "k = v\n[a",
    @r"
header_cut_off_by_eof.ini:2:3: error: invalid syntax
    [a
      ^
showing 1 error
"
);

invalid!(
    indented_key,
    "  a = 1\n",
    @r"
indented_key.ini:1:1: error: invalid syntax
      a = 1
    ^
showing 1 error
"
);
