use super::LibDefault::{Bool, Dynamic, Int, Name, Required, Str};
use super::ParamKind::{KeywordOnly, PositionalOrKeyword, VarKeyword, VarPositional};
use super::{FunctionDescriptor, LibDefault, Param};

const fn pk(name: &'static str, default: LibDefault) -> Param {
    Param::new(name, PositionalOrKeyword, default)
}

const fn kw(name: &'static str, default: LibDefault) -> Param {
    Param::new(name, KeywordOnly, default)
}

/// `numpy.zeros(shape, dtype=float, order='C', *, like=None)`
pub static ZEROS: FunctionDescriptor = FunctionDescriptor {
    module: "numpy",
    name: "zeros",
    params: &[
        pk("shape", Required),
        pk("dtype", Name("float")),
        pk("order", Str("C")),
        kw("like", LibDefault::None),
    ],
};

/// `numpy.array(object, dtype=None, *, copy=True, order='K', subok=False, ndmin=0, like=None)`
pub static ARRAY: FunctionDescriptor = FunctionDescriptor {
    module: "numpy",
    name: "array",
    params: &[
        pk("object", Required),
        pk("dtype", LibDefault::None),
        kw("copy", Bool(true)),
        kw("order", Str("K")),
        kw("subok", Bool(false)),
        kw("ndmin", Int(0)),
        kw("like", LibDefault::None),
    ],
};

/// `numpy.arange([start,] stop[, step,], dtype=None, *, like=None)`
///
/// A single positional argument lands in `start`; the arange rules
/// reinterpret it as `stop` when `stop` is unset.
pub static ARANGE: FunctionDescriptor = FunctionDescriptor {
    module: "numpy",
    name: "arange",
    params: &[
        pk("start", Int(0)),
        pk("stop", Dynamic),
        pk("step", Int(1)),
        pk("dtype", LibDefault::None),
        kw("like", LibDefault::None),
    ],
};

/// `matplotlib.pyplot.show(block=None)`
pub static SHOW: FunctionDescriptor = FunctionDescriptor {
    module: "matplotlib.pyplot",
    name: "show",
    params: &[pk("block", LibDefault::None)],
};

/// `matplotlib.pyplot.plot(*args, scalex=True, scaley=True, data=None, **kwargs)`
/// with the `Line2D` properties spelled out so aliases resolve.
pub static PLOT: FunctionDescriptor = FunctionDescriptor {
    module: "matplotlib.pyplot",
    name: "plot",
    params: &[
        Param::new("args", VarPositional, Dynamic),
        kw("scalex", Bool(true)),
        kw("scaley", Bool(true)),
        kw("data", LibDefault::None),
        kw("agg_filter", Dynamic),
        kw("alpha", Dynamic),
        kw("animated", Dynamic),
        kw("antialiased", Dynamic).with_aliases(&["aa"]),
        kw("clip_box", Dynamic),
        kw("clip_on", Dynamic),
        kw("clip_path", Dynamic),
        kw("color", Dynamic).with_aliases(&["c"]),
        kw("contains", Dynamic),
        kw("dash_capstyle", Dynamic),
        kw("dash_joinstyle", Dynamic),
        kw("dashes", Dynamic),
        kw("drawstyle", Dynamic).with_aliases(&["ds"]),
        kw("figure", Dynamic),
        kw("fillstyle", Dynamic),
        kw("gid", Dynamic),
        kw("in_layout", Dynamic),
        kw("label", Dynamic),
        kw("linestyle", Dynamic).with_aliases(&["ls"]),
        kw("linewidth", Dynamic).with_aliases(&["lw"]),
        kw("marker", Dynamic),
        kw("markeredgecolor", Dynamic).with_aliases(&["mec"]),
        kw("markeredgewidth", Dynamic).with_aliases(&["mew"]),
        kw("markerfacecolor", Dynamic).with_aliases(&["mfc"]),
        kw("markerfacecoloralt", Dynamic).with_aliases(&["mfcalt"]),
        kw("markersize", Dynamic).with_aliases(&["ms"]),
        kw("markevery", Dynamic),
        kw("path_effects", Dynamic),
        kw("picker", LibDefault::None),
        kw("pickradius", Dynamic),
        kw("rasterized", Dynamic),
        kw("sketch_params", Dynamic),
        kw("snap", Dynamic),
        kw("solid_capstyle", Dynamic),
        kw("solid_joinstyle", Dynamic),
        kw("transform", Dynamic),
        kw("url", Dynamic),
        kw("visible", Dynamic),
        kw("xdata", Dynamic),
        kw("ydata", Dynamic),
        kw("zorder", Dynamic),
        Param::new("kwargs", VarKeyword, Dynamic),
    ],
};

/// `pandas.DataFrame(data=None, index=None, columns=None, dtype=None, copy=False)`
pub static DATAFRAME: FunctionDescriptor = FunctionDescriptor {
    module: "pandas",
    name: "DataFrame",
    params: &[
        pk("data", LibDefault::None),
        pk("index", LibDefault::None),
        pk("columns", LibDefault::None),
        pk("dtype", LibDefault::None),
        pk("copy", Bool(false)),
    ],
};

/// `pandas.read_csv` as of the 1.x series, in positional order.
pub static READ_CSV: FunctionDescriptor = FunctionDescriptor {
    module: "pandas",
    name: "read_csv",
    params: &[
        pk("filepath_or_buffer", Required),
        pk("sep", Str(",")),
        pk("delimiter", LibDefault::None),
        pk("header", Str("infer")),
        pk("names", LibDefault::None),
        pk("index_col", LibDefault::None),
        pk("usecols", LibDefault::None),
        pk("squeeze", Bool(false)),
        pk("prefix", LibDefault::None),
        pk("mangle_dupe_cols", Bool(true)),
        pk("dtype", LibDefault::None),
        pk("engine", LibDefault::None),
        pk("converters", LibDefault::None),
        pk("true_values", LibDefault::None),
        pk("false_values", LibDefault::None),
        pk("skipinitialspace", Bool(false)),
        pk("skiprows", LibDefault::None),
        pk("skipfooter", Int(0)),
        pk("nrows", LibDefault::None),
        pk("na_values", LibDefault::None),
        pk("keep_default_na", Bool(true)),
        pk("na_filter", Bool(true)),
        pk("verbose", Bool(false)),
        pk("skip_blank_lines", Bool(true)),
        pk("parse_dates", Bool(false)),
        pk("infer_datetime_format", Bool(false)),
        pk("keep_date_col", Bool(false)),
        pk("date_parser", LibDefault::None),
        pk("dayfirst", Bool(false)),
        pk("cache_dates", Bool(true)),
        pk("iterator", Bool(false)),
        pk("chunksize", LibDefault::None),
        pk("compression", Str("infer")),
        pk("thousands", LibDefault::None),
        pk("decimal", Str(".")),
        pk("lineterminator", LibDefault::None),
        pk("quotechar", Str("\"")),
        pk("quoting", Int(0)),
        pk("doublequote", Bool(true)),
        pk("escapechar", LibDefault::None),
        pk("comment", LibDefault::None),
        pk("encoding", LibDefault::None),
        pk("dialect", LibDefault::None),
        pk("error_bad_lines", Bool(true)),
        pk("warn_bad_lines", Bool(true)),
        pk("delim_whitespace", Bool(false)),
        pk("low_memory", Bool(true)),
        pk("memory_map", Bool(false)),
        pk("float_precision", LibDefault::None),
        kw("encoding_errors", Str("strict")),
        kw("on_bad_lines", LibDefault::None),
        kw("storage_options", LibDefault::None),
    ],
};
