//! ca65 control commands, pseudo functions, and pseudo variables.
//! Used by completions and by the hover provider's keyword check.

pub const CONTROL_COMMANDS: [&str;113] = [
    ".a16",".a8",".addr",".align",".asciiz",".assert",".autoimport",
    ".bankbytes",".bss",".byt",".byte",".case",".charmap",".code",".condes",
    ".constructor",".cpu",".data",".dbyt",".debuginfo",".define",".delmacro",
    ".destructor",".dword",".else",".elseif",".end",".endenum",".endif",
    ".endmac",".endmacro",".endproc",".endrep",".endrepeat",".endscope",
    ".endstruct",".endunion",".enum",".error",".exitmac",".exitmacro",
    ".export",".exportzp",".faraddr",".fatal",".feature",".fileopt",
    ".fopt",".forceimport",".global",".globalzp",".hibytes",".i16",".i8",
    ".if",".ifblank",".ifconst",".ifdef",".ifnblank",".ifndef",".ifnref",
    ".ifp02",".ifp816",".ifpc02",".ifpsc02",".ifref",".import",".importzp",
    ".incbin",".include",".interruptor",".linecont",".list",".listbytes",
    ".literal",".lobytes",".local",".localchar",".mac",".macpack",".macro",
    ".org",".out",".p02",".p816",".pagelen",".pagelength",".pc02",".popcpu",
    ".popseg",".proc",".psc02",".pushcpu",".pushseg",".referto",".refto",
    ".reloc",".repeat",".res",".rodata",".scope",".segment",".set",".setcpu",
    ".smart",".struct",".tag",".undef",".undefine",".union",".warning",
    ".word",".zeropage"
];

pub const PSEUDO_FUNCTIONS: [&str;26] = [
    ".addrsize",".bank",".bankbyte",".blank",".concat",".const",".hibyte",
    ".hiword",".ident",".left",".lobyte",".loword",".match",".max",".mid",
    ".min",".paramcount",".right",".sizeof",".sprintf",".strat",".string",
    ".strlen",".tcount",".xmatch",".defined"
];

pub const PSEUDO_VARIABLES: [&str;6] = [
    ".asize",".cpu",".isize",".time",".version","*"
];

pub fn is_control_command(txt: &str) -> bool {
    let lower = txt.to_lowercase();
    CONTROL_COMMANDS.iter().any(|c| *c == lower)
}
